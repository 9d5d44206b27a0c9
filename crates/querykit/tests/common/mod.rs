#![allow(dead_code)]

use querykit_derive::Model;

#[derive(Debug, Clone, PartialEq, Model)]
pub struct Address {
    pub city: String,
    pub postcode: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Model)]
pub struct Book {
    pub title: String,
    pub pages: i64,
}

#[derive(Debug, Clone, PartialEq, Model)]
#[model(entity = "Person", rename_all = "camelCase")]
pub struct Author {
    pub name: String,
    pub age: i64,
    pub is_active: bool,
    pub rating: f64,
    #[attribute(name = "mail")]
    pub email: Option<String>,
    #[attribute(relation)]
    pub address: Address,
    #[attribute(to_many)]
    pub books: Vec<Book>,
    #[attribute(skip)]
    pub cache: Vec<u64>,
}

pub fn kyle() -> Author {
    Author {
        name: String::from("Kyle"),
        age: 29,
        is_active: true,
        rating: 4.5,
        email: None,
        address: Address {
            city: String::from("London"),
            postcode: Some(String::from("N1")),
        },
        books: vec![
            Book {
                title: String::from("Swift"),
                pages: 120,
            },
            Book {
                title: String::from("Rust"),
                pages: 480,
            },
        ],
        cache: Vec::new(),
    }
}
