#![allow(dead_code)]

use std::sync::{Arc, Once};

use chrono::{DateTime, TimeZone, Utc};
use querykit::QuerySet;
use querykit_derive::Model;
use querykit_memory::MemoryStore;

#[derive(Debug, Clone, PartialEq, Model)]
pub struct Book {
    pub title: String,
    pub pages: i64,
}

#[derive(Debug, Clone, PartialEq, Model)]
pub struct Address {
    pub city: String,
}

#[derive(Debug, Clone, PartialEq, Model)]
#[model(rename_all = "camelCase")]
pub struct Person {
    pub name: String,
    pub age: i64,
    pub is_active: bool,
    pub nickname: Option<String>,
    pub joined: DateTime<Utc>,
    #[attribute(relation)]
    pub address: Address,
    #[attribute(to_many)]
    pub books: Vec<Book>,
}

static TRACING: Once = Once::new();

pub fn init_tracing() {
    TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::DEBUG)
            .with_test_writer()
            .try_init();
    });
}

fn person(name: &str, age: i64, active: bool, city: &str, pages: &[i64]) -> Person {
    Person {
        name: name.to_string(),
        age,
        is_active: active,
        nickname: None,
        joined: Utc.with_ymd_and_hms(2014, 6, 19, 0, 0, 0).unwrap(),
        address: Address {
            city: city.to_string(),
        },
        books: pages
            .iter()
            .enumerate()
            .map(|(i, p)| Book {
                title: format!("{name} vol. {}", i + 1),
                pages: *p,
            })
            .collect(),
    }
}

pub fn people() -> Vec<Person> {
    let mut kyle = person("Kyle", 29, true, "London", &[120, 480]);
    kyle.nickname = Some(String::from("kylef"));
    vec![
        kyle,
        person("Ayaka", 34, true, "Tokyo", &[300]),
        person("Ben", 17, false, "London", &[]),
        person("Cara", 29, true, "Paris", &[50, 60, 70]),
        person("Dev", 65, false, "Tokyo", &[200]),
    ]
}

pub fn store() -> Arc<MemoryStore<Person>> {
    init_tracing();
    Arc::new(MemoryStore::new(people()))
}

pub fn names(qs: &QuerySet<Person>) -> Vec<String> {
    qs.fetch_all()
        .unwrap_or_else(|e| panic!("fetch failed: {e}"))
        .into_iter()
        .map(|p| p.name)
        .collect()
}
