//! Locally held rows with optimistic writes.

use std::future::Future;

use tracing::warn;

use crate::error::ActionError;
use crate::resource::Resource;

/// Server side of a store. [`ApiClient`](crate::ApiClient) implements it for
/// every [`Resource`].
pub trait Remote<R: Resource> {
    fn list(&self) -> impl Future<Output = Result<Vec<R::Entity>, ActionError>> + Send;

    fn create(
        &self,
        input: &R::Create,
    ) -> impl Future<Output = Result<R::Saved, ActionError>> + Send;

    fn update(
        &self,
        id: R::Id,
        changes: &R::Update,
    ) -> impl Future<Output = Result<R::Saved, ActionError>> + Send;

    fn delete(&self, id: R::Id) -> impl Future<Output = Result<(), ActionError>> + Send;
}

/// Rows of one resource, kept in list order.
///
/// Writes change `items` before the remote call and put the previous rows
/// back when the call fails, so a rejected change never lingers on screen.
pub struct OptimisticStore<R: Resource, C> {
    remote: C,
    items: Vec<R::Entity>,
}

impl<R, C> OptimisticStore<R, C>
where
    R: Resource,
    C: Remote<R>,
{
    pub fn new(remote: C) -> Self {
        Self {
            remote,
            items: Vec::new(),
        }
    }

    pub fn remote(&self) -> &C {
        &self.remote
    }

    /// Replaces the local rows with the server's.
    pub async fn load(&mut self) -> Result<(), ActionError> {
        self.items = self.remote.list().await?;
        Ok(())
    }

    pub fn items(&self) -> &[R::Entity] {
        &self.items
    }

    pub fn get(&self, id: R::Id) -> Option<&R::Entity> {
        self.items.iter().find(|item| R::id(item) == id)
    }

    fn position(&self, id: R::Id) -> Result<usize, ActionError> {
        self.items
            .iter()
            .position(|item| R::id(item) == id)
            .ok_or_else(|| ActionError::Missing {
                resource: R::PATH,
                id: id.to_string(),
            })
    }

    /// Shows a placeholder at the top of the list until the server answers,
    /// then swaps in the stored row.
    pub async fn create(&mut self, input: &R::Create) -> Result<R::Entity, ActionError> {
        let snapshot = self.items.clone();
        let placeholder = R::placeholder(input);
        let temp_id = R::id(&placeholder);
        self.items.insert(0, placeholder);

        match self.remote.create(input).await {
            Ok(saved) => {
                let row = R::from_saved(saved, None);
                match self.items.iter_mut().find(|item| R::id(item) == temp_id) {
                    Some(slot) => *slot = row.clone(),
                    None => self.items.insert(0, row.clone()),
                }
                Ok(row)
            }
            Err(e) => {
                warn!(resource = R::PATH, error = %e, "Create rejected, rolling back");
                self.items = snapshot;
                Err(e)
            }
        }
    }

    pub async fn update(&mut self, id: R::Id, changes: &R::Update) -> Result<R::Entity, ActionError> {
        let index = self.position(id)?;
        let snapshot = self.items.clone();
        let previous = snapshot[index].clone();
        R::apply(&mut self.items[index], changes);

        match self.remote.update(id, changes).await {
            Ok(saved) => {
                let row = R::from_saved(saved, Some(&previous));
                if let Some(slot) = self.items.iter_mut().find(|item| R::id(item) == id) {
                    *slot = row.clone();
                }
                Ok(row)
            }
            Err(e) => {
                warn!(resource = R::PATH, %id, error = %e, "Update rejected, rolling back");
                self.items = snapshot;
                Err(e)
            }
        }
    }

    pub async fn remove(&mut self, id: R::Id) -> Result<(), ActionError> {
        let index = self.position(id)?;
        let snapshot = self.items.clone();
        self.items.remove(index);

        if let Err(e) = self.remote.delete(id).await {
            warn!(resource = R::PATH, %id, error = %e, "Delete rejected, rolling back");
            self.items = snapshot;
            return Err(e);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::{Deserialize, Serialize};
    use std::sync::Mutex;
    use uuid::Uuid;

    #[derive(Debug, Clone, PartialEq, Deserialize)]
    struct Note {
        id: Uuid,
        text: String,
    }

    #[derive(Serialize)]
    struct NoteInput {
        text: String,
    }

    struct Notes;

    impl Resource for Notes {
        const PATH: &'static str = "notes";
        type Id = Uuid;
        type Entity = Note;
        type Saved = Note;
        type Create = NoteInput;
        type Update = NoteInput;

        fn id(entity: &Note) -> Uuid {
            entity.id
        }

        fn placeholder(input: &NoteInput) -> Note {
            Note {
                id: Uuid::new_v4(),
                text: input.text.clone(),
            }
        }

        fn apply(entity: &mut Note, changes: &NoteInput) {
            entity.text = changes.text.clone();
        }

        fn from_saved(saved: Note, _: Option<&Note>) -> Note {
            saved
        }
    }

    /// Accepts writes unless `reject` is set; records what the store
    /// showed while each call was in flight.
    struct MockRemote {
        rows: Vec<Note>,
        reject: bool,
        server_id: Uuid,
        calls: Mutex<Vec<&'static str>>,
    }

    impl MockRemote {
        fn new(rows: Vec<Note>, reject: bool) -> Self {
            Self {
                rows,
                reject,
                server_id: Uuid::new_v4(),
                calls: Mutex::new(Vec::new()),
            }
        }

        fn outcome<T>(&self, call: &'static str, value: T) -> Result<T, ActionError> {
            self.calls.lock().unwrap().push(call);
            if self.reject {
                Err(ActionError::from_response(
                    422,
                    r#"{"error":"Text is required","field":"text"}"#,
                ))
            } else {
                Ok(value)
            }
        }
    }

    impl Remote<Notes> for MockRemote {
        async fn list(&self) -> Result<Vec<Note>, ActionError> {
            Ok(self.rows.clone())
        }

        async fn create(&self, input: &NoteInput) -> Result<Note, ActionError> {
            self.outcome(
                "create",
                Note {
                    id: self.server_id,
                    text: input.text.clone(),
                },
            )
        }

        async fn update(&self, id: Uuid, changes: &NoteInput) -> Result<Note, ActionError> {
            self.outcome(
                "update",
                Note {
                    id,
                    text: format!("{} (saved)", changes.text),
                },
            )
        }

        async fn delete(&self, _id: Uuid) -> Result<(), ActionError> {
            self.outcome("delete", ())
        }
    }

    fn note(text: &str) -> Note {
        Note {
            id: Uuid::new_v4(),
            text: text.to_string(),
        }
    }

    async fn loaded(reject: bool) -> OptimisticStore<Notes, MockRemote> {
        let rows = vec![note("first"), note("second")];
        let mut store = OptimisticStore::new(MockRemote::new(rows, reject));
        store.load().await.unwrap();
        store
    }

    #[tokio::test]
    async fn test_create_replaces_placeholder_with_server_row() {
        let mut store = loaded(false).await;
        let input = NoteInput {
            text: "third".to_string(),
        };

        let row = store.create(&input).await.unwrap();

        assert_eq!(row.id, store.remote().server_id);
        assert_eq!(store.items().len(), 3);
        assert_eq!(store.items()[0], row);
        assert_eq!(
            store.items().iter().filter(|n| n.text == "third").count(),
            1
        );
    }

    #[tokio::test]
    async fn test_rejected_create_restores_rows() {
        let mut store = loaded(true).await;
        let before = store.items().to_vec();

        let err = store
            .create(&NoteInput {
                text: String::new(),
            })
            .await
            .unwrap_err();

        assert_eq!(err.field(), Some("text"));
        assert_eq!(store.items(), before.as_slice());
    }

    #[tokio::test]
    async fn test_update_uses_server_row() {
        let mut store = loaded(false).await;
        let id = store.items()[1].id;

        store
            .update(
                id,
                &NoteInput {
                    text: "edited".to_string(),
                },
            )
            .await
            .unwrap();

        assert_eq!(store.get(id).unwrap().text, "edited (saved)");
    }

    #[tokio::test]
    async fn test_rejected_update_restores_row() {
        let mut store = loaded(true).await;
        let id = store.items()[0].id;

        let result = store
            .update(
                id,
                &NoteInput {
                    text: "edited".to_string(),
                },
            )
            .await;

        assert!(result.is_err());
        assert_eq!(store.get(id).unwrap().text, "first");
    }

    #[tokio::test]
    async fn test_rejected_delete_restores_row_in_place() {
        let mut store = loaded(true).await;
        let before = store.items().to_vec();

        let err = store.remove(before[0].id).await.unwrap_err();

        assert_eq!(err.status(), Some(422));
        assert_eq!(store.items(), before.as_slice());
    }

    #[tokio::test]
    async fn test_delete_removes_row() {
        let mut store = loaded(false).await;
        let id = store.items()[0].id;

        store.remove(id).await.unwrap();

        assert!(store.get(id).is_none());
        assert_eq!(store.items().len(), 1);
    }

    #[tokio::test]
    async fn test_unknown_id_skips_remote() {
        let mut store = loaded(false).await;

        let err = store.remove(Uuid::new_v4()).await.unwrap_err();

        assert!(matches!(err, ActionError::Missing { resource: "notes", .. }));
        assert!(store.remote().calls.lock().unwrap().is_empty());
    }
}
