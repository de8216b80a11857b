use crate::UserRecord;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    FetchUsers,
    ShowRows(Vec<UserRecord>),
}
