use std::collections::{HashMap, HashSet};

use crate::db::Repository;
use crate::error::Result;
use crate::feed::PersonRef;
use crate::models::{Person, PersonKey};

/// Resolves upstream author references to feed-scoped `Person` rows.
///
/// Known identities are reused; unknown ones get a pre-allocated id and are
/// returned by `into_new_persons` so the caller can insert them in the same
/// transaction as the rows that link to them.
pub struct PersonRegistry<'a> {
    repository: &'a Repository,
    feed_id: &'a str,
    resolved: HashMap<PersonKey, String>,
    created: Vec<Person>,
}

impl<'a> PersonRegistry<'a> {
    pub fn new(repository: &'a Repository, feed_id: &'a str) -> Self {
        Self {
            repository,
            feed_id,
            resolved: HashMap::new(),
            created: Vec::new(),
        }
    }

    pub async fn resolve_all<'p>(
        &mut self,
        people: impl IntoIterator<Item = &'p PersonRef>,
    ) -> Result<()> {
        for key in unique_keys(people) {
            if self.resolved.contains_key(&key) {
                continue;
            }

            let id = match self.repository.find_person(self.feed_id, &key).await? {
                Some(existing) => existing.id,
                None => {
                    let person = Person {
                        id: self.repository.next_id()?,
                        feed_id: self.feed_id.to_string(),
                        name: key.name.clone(),
                        email: key.email.clone(),
                    };
                    let id = person.id.clone();
                    self.created.push(person);
                    id
                }
            };
            self.resolved.insert(key, id);
        }
        Ok(())
    }

    /// Person ids to link for an author list, one per distinct identity, in
    /// first-seen order. Unresolved authors are skipped.
    pub fn link_ids(&self, authors: &[PersonRef]) -> Vec<String> {
        unique_keys(authors)
            .into_iter()
            .filter_map(|key| self.resolved.get(&key).cloned())
            .collect()
    }

    pub fn into_new_persons(self) -> Vec<Person> {
        self.created
    }
}

/// Distinct identity keys in first-seen order.
fn unique_keys<'p>(people: impl IntoIterator<Item = &'p PersonRef>) -> Vec<PersonKey> {
    let mut seen = HashSet::new();
    people
        .into_iter()
        .map(PersonKey::from)
        .filter(|key| seen.insert(key.clone()))
        .collect()
}
