use tabled::{settings::Style, Table, Tabled};

use crate::model::{AssetWithOwner, User};
use crate::storage::InventoryStats;

#[derive(Tabled)]
struct UserRow {
    #[tabled(rename = "User ID")]
    user_id: i64,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Email")]
    email: String,
    #[tabled(rename = "Department")]
    department: String,
}

#[derive(Tabled)]
struct AssetRow {
    #[tabled(rename = "Asset ID")]
    id: i64,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Category")]
    category: String,
    #[tabled(rename = "Purchase Date")]
    purchase_date: String,
    #[tabled(rename = "Price")]
    price: String,
    #[tabled(rename = "Status")]
    status: String,
    #[tabled(rename = "Location")]
    location: String,
    #[tabled(rename = "User")]
    owner: String,
    #[tabled(rename = "Department")]
    department: String,
}

#[derive(Tabled)]
struct MetricRow {
    #[tabled(rename = "Metric")]
    metric: String,
    #[tabled(rename = "Value")]
    value: String,
}

fn render<T: Tabled>(rows: Vec<T>) -> String {
    if rows.is_empty() {
        return String::new();
    }
    Table::new(rows).with(Style::rounded()).to_string()
}

/// Users as a table; empty string when there are none
pub fn users_table(users: &[User]) -> String {
    render(
        users
            .iter()
            .map(|u| UserRow {
                user_id: u.user_id,
                name: u.name.clone(),
                email: u.email.clone(),
                department: u.department.clone(),
            })
            .collect(),
    )
}

/// The joined inventory listing as a table; empty string when there are no assets
pub fn assets_table(rows: &[AssetWithOwner]) -> String {
    render(
        rows.iter()
            .map(|r| AssetRow {
                id: r.asset.id,
                name: r.asset.name.clone(),
                category: r.asset.category.clone(),
                purchase_date: r.asset.purchase_date.to_string(),
                price: format!("{:.2}", r.asset.purchase_price),
                status: r.asset.status.clone(),
                location: r.asset.location.clone(),
                owner: r.owner_name.clone(),
                department: r.owner_department.clone(),
            })
            .collect(),
    )
}

pub fn stats_table(stats: &InventoryStats) -> String {
    let rows = [
        ("Users", stats.users.to_string()),
        ("Assets", stats.assets.to_string()),
        ("Users without assets", stats.idle_users.to_string()),
        ("Total purchase value", format!("{:.2}", stats.total_value)),
    ];
    render(
        rows.into_iter()
            .map(|(metric, value)| MetricRow { metric: metric.to_string(), value })
            .collect(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_listing_renders_nothing() {
        assert_eq!(users_table(&[]), "");
        assert_eq!(assets_table(&[]), "");
    }

    #[test]
    fn test_users_table_has_headers_and_values() {
        let users = vec![User {
            user_id: 1,
            name: "Ada".to_string(),
            email: "a@x.com".to_string(),
            department: "Eng".to_string(),
        }];
        let table = users_table(&users);
        assert!(table.contains("User ID"));
        assert!(table.contains("Ada"));
        assert!(table.contains("a@x.com"));
    }

    #[test]
    fn test_stats_table_formats_value() {
        let stats = InventoryStats { users: 2, assets: 1, idle_users: 1, total_value: 999.0 };
        let table = stats_table(&stats);
        assert!(table.contains("Users without assets"));
        assert!(table.contains("999.00"));
    }
}
