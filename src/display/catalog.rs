//! Account catalog display formatting
//!
//! Formats the catalog as a tree: categories as headers, subtypes and
//! accounts underneath.

use crate::models::Catalog;

/// Format the account catalog as a tree structure
pub fn format_catalog_tree(catalog: &Catalog) -> String {
    if catalog.is_empty() {
        return "Account catalog is empty.\n".to_string();
    }

    let mut output = String::new();
    let categories = catalog.categories();

    for (i, category) in categories.iter().enumerate() {
        output.push_str(&format!("{}\n", category));

        let subtypes = catalog.subtypes(category);
        for (j, subtype) in subtypes.iter().enumerate() {
            let is_last_subtype = j == subtypes.len() - 1;
            let prefix = if is_last_subtype { "└── " } else { "├── " };
            output.push_str(&format!("  {}{}\n", prefix, subtype));

            let continuation = if is_last_subtype { "    " } else { "│   " };
            let accounts = catalog.accounts(category, subtype);
            for (k, account) in accounts.iter().enumerate() {
                let account_prefix = if k == accounts.len() - 1 {
                    "└── "
                } else {
                    "├── "
                };
                output.push_str(&format!("  {}{}{}\n", continuation, account_prefix, account));
            }
        }

        // Blank line between categories (except after last)
        if i < categories.len() - 1 {
            output.push('\n');
        }
    }

    output
}
