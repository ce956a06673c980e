//! User display formatting

use tabled::Tabled;

use crate::models::User;

use super::render_table;

#[derive(Tabled)]
struct UserRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Username")]
    username: String,
    #[tabled(rename = "Created")]
    created: String,
    #[tabled(rename = "")]
    current: &'static str,
}

/// Users as a table, marking the current one
pub fn format_user_list(users: &[User], current: Option<&str>) -> String {
    if users.is_empty() {
        return "No users found.\n\nCreate one with 'upkeep user add <name>'.".to_string();
    }

    let rows = users
        .iter()
        .map(|u| UserRow {
            id: u.id.to_string(),
            username: u.username.clone(),
            created: u.created_at.format("%Y-%m-%d").to_string(),
            current: match current {
                Some(name) if name.eq_ignore_ascii_case(&u.username) => "*",
                _ => "",
            },
        })
        .collect();

    render_table(rows)
}
