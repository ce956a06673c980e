//! Category display formatting

use tabled::Tabled;

use crate::models::Category;

use super::render_table;

#[derive(Tabled)]
struct CategoryRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Expenses")]
    expenses: usize,
    #[tabled(rename = "Description")]
    description: String,
}

/// Categories with the number of the current user's expenses in each
pub fn format_category_list(categories: &[(Category, usize)]) -> String {
    if categories.is_empty() {
        return "No categories found.".to_string();
    }

    let rows = categories
        .iter()
        .map(|(c, count)| CategoryRow {
            id: c.id.to_string(),
            name: c.name.clone(),
            expenses: *count,
            description: c.description.clone(),
        })
        .collect();

    render_table(rows)
}

pub fn format_category_details(category: &Category, expense_count: usize) -> String {
    let mut output = String::new();
    output.push_str(&format!("Category: {}\n", category.name));
    output.push_str(&format!("  ID:          {}\n", category.id));
    if !category.description.is_empty() {
        output.push_str(&format!("  Description: {}\n", category.description));
    }
    output.push_str(&format!("  Expenses:    {}\n", expense_count));
    output.push_str(&format!(
        "  Created:     {}\n",
        category.created_at.format("%Y-%m-%d %H:%M")
    ));
    output
}
