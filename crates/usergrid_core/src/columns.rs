//! Column definitions and cell formatting for the users grid.

use serde::{Deserialize, Serialize};

use crate::UserRecord;

/// Placeholder for empty cells.
pub const EMPTY_CELL: &str = "—";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Column {
    Id,
    Name,
    Username,
    Email,
    Phone,
    Website,
    City,
    Company,
}

impl Column {
    pub const ALL: [Column; 8] = [
        Column::Id,
        Column::Name,
        Column::Username,
        Column::Email,
        Column::Phone,
        Column::Website,
        Column::City,
        Column::Company,
    ];

    pub fn header(self) -> &'static str {
        match self {
            Column::Id => "ID",
            Column::Name => "Name",
            Column::Username => "Username",
            Column::Email => "Email",
            Column::Phone => "Phone",
            Column::Website => "Website",
            Column::City => "City",
            Column::Company => "Company",
        }
    }
}

pub fn format_cell(column: Column, record: &UserRecord) -> String {
    let text = match column {
        Column::Id => record.id.to_string(),
        Column::Name => record.name.trim().to_string(),
        Column::Username => record.username.trim().to_string(),
        Column::Email => record.email.trim().to_lowercase(),
        Column::Phone => strip_extension(&record.phone),
        Column::Website => website_link(&record.website),
        Column::City => city_with_zip(&record.address.city, &record.address.zipcode),
        Column::Company => record.company.name.trim().to_string(),
    };
    if text.is_empty() {
        EMPTY_CELL.to_string()
    } else {
        text
    }
}

/// "1-770-736-8031 x56442" -> "1-770-736-8031"
fn strip_extension(phone: &str) -> String {
    let phone = phone.trim();
    match phone.find(" x") {
        Some(idx) => phone[..idx].trim_end().to_string(),
        None => phone.to_string(),
    }
}

fn website_link(website: &str) -> String {
    let website = website.trim();
    if website.is_empty() || website.contains("://") {
        website.to_string()
    } else {
        format!("https://{website}")
    }
}

fn city_with_zip(city: &str, zipcode: &str) -> String {
    match (city.trim(), zipcode.trim()) {
        ("", _) => String::new(),
        (city, "") => city.to_string(),
        (city, zip) => format!("{city} ({zip})"),
    }
}
