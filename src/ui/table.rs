use crate::entity::{Product, User};
use crate::storage::DbStats;
use tabled::{settings::Style, Table, Tabled};

#[derive(Tabled)]
struct UserRow {
    #[tabled(rename = "ID")]
    id: i64,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Email")]
    email: String,
}

#[derive(Tabled)]
struct ProductRow {
    #[tabled(rename = "ID")]
    id: i64,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Price")]
    price: String,
}

#[derive(Tabled)]
struct StatRow {
    #[tabled(rename = "Collection")]
    collection: &'static str,
    #[tabled(rename = "Rows")]
    rows: usize,
}

fn render<T: Tabled>(rows: Vec<T>) -> String {
    if rows.is_empty() {
        return String::new();
    }
    Table::new(rows).with(Style::rounded()).to_string()
}

pub fn users_table(users: &[User]) -> String {
    render(
        users
            .iter()
            .map(|u| UserRow {
                id: u.id,
                name: u.name.clone(),
                email: u.email.clone(),
            })
            .collect(),
    )
}

pub fn products_table(products: &[Product]) -> String {
    render(
        products
            .iter()
            .map(|p| ProductRow {
                id: p.id,
                name: p.name.clone(),
                price: format!("{:.2}", p.price),
            })
            .collect(),
    )
}

pub fn stats_table(stats: &DbStats) -> String {
    render(vec![
        StatRow { collection: "users", rows: stats.users },
        StatRow { collection: "products", rows: stats.products },
    ])
}
