use serde::{Deserialize, Serialize};

use crate::feed::PersonRef;

/// An author, scoped to one feed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Person {
    pub id: String,
    pub feed_id: String,
    pub name: String,
    pub email: String,
}

/// Identity of an author within a feed's author set.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PersonKey {
    pub name: String,
    pub email: String,
}

impl From<&PersonRef> for PersonKey {
    fn from(person: &PersonRef) -> Self {
        Self {
            name: person.name.clone(),
            email: person.email.clone(),
        }
    }
}
