//! Room service — use-cases for managing rooms.

use techhome_domain::error::{HomeError, NotFoundError};
use techhome_domain::id::RoomId;
use techhome_domain::room::Room;

use crate::ports::RoomRepository;

/// Application service for room CRUD operations.
pub struct RoomService<R> {
    repo: R,
}

impl<R: RoomRepository> RoomService<R> {
    /// Create a new service backed by the given repository.
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Create a new room after validating domain invariants.
    ///
    /// # Errors
    ///
    /// Returns [`HomeError::Validation`] if invariants fail, or a
    /// storage error propagated from the repository.
    #[tracing::instrument(skip(self, room), fields(room_name = %room.name))]
    pub async fn create_room(&self, room: Room) -> Result<Room, HomeError> {
        room.validate()?;
        self.repo.create(room).await
    }

    /// Look up a room by id, returning an error if not found.
    ///
    /// # Errors
    ///
    /// Returns [`HomeError::NotFound`] when no room with `id` exists,
    /// or a storage error from the repository.
    #[tracing::instrument(skip(self))]
    pub async fn get_room(&self, id: RoomId) -> Result<Room, HomeError> {
        self.repo.get_by_id(id).await?.ok_or_else(|| {
            NotFoundError {
                entity: "Room",
                id: id.to_string(),
            }
            .into()
        })
    }

    /// List all rooms.
    ///
    /// # Errors
    ///
    /// Returns a storage error propagated from the repository.
    pub async fn list_rooms(&self) -> Result<Vec<Room>, HomeError> {
        self.repo.get_all().await
    }

    /// Update an existing room.
    ///
    /// # Errors
    ///
    /// Returns [`HomeError::Validation`] if invariants fail, or a
    /// storage error from the repository.
    #[tracing::instrument(skip(self, room))]
    pub async fn update_room(&self, room: Room) -> Result<Room, HomeError> {
        room.validate()?;
        self.repo.update(room).await
    }

    /// Delete a room by id.
    ///
    /// # Errors
    ///
    /// Returns a storage error propagated from the repository.
    #[tracing::instrument(skip(self))]
    pub async fn delete_room(&self, id: RoomId) -> Result<(), HomeError> {
        self.repo.delete(id).await
    }
}
