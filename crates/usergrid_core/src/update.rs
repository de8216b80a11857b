use crate::{Effect, LoadPhase, Msg, UsersState};

/// Pure update function: applies a message to state and returns any effects.
pub fn update(mut state: UsersState, msg: Msg) -> (UsersState, Vec<Effect>) {
    let effects = match msg {
        Msg::LoadRequested => match state.phase() {
            LoadPhase::Idle | LoadPhase::Loaded => {
                state.start_loading();
                vec![Effect::FetchUsers]
            }
            // A fetch is already in flight, or the banner's retry is the
            // only way out of a failure.
            LoadPhase::Loading | LoadPhase::Failed => Vec::new(),
        },
        Msg::RetryClicked => {
            if state.phase() == LoadPhase::Failed {
                state.start_loading();
                vec![Effect::FetchUsers]
            } else {
                Vec::new()
            }
        }
        Msg::LoadSucceeded(rows) => {
            if state.phase() == LoadPhase::Loading {
                state.apply_success(rows.clone());
                vec![Effect::ShowRows(rows)]
            } else {
                Vec::new()
            }
        }
        Msg::LoadFailed(failure) => {
            if state.phase() == LoadPhase::Loading {
                state.apply_failure(failure);
            }
            Vec::new()
        }
        Msg::LoadCancelled => {
            if state.phase() == LoadPhase::Loading {
                state.cancel_loading();
            }
            Vec::new()
        }
        Msg::RowClicked { user_id } => {
            state.record_click(user_id);
            Vec::new()
        }
        Msg::SelectionChanged { user_ids } => {
            state.set_selection(user_ids);
            Vec::new()
        }
    };

    (state, effects)
}
