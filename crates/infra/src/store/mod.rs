//! Club directory persistence: users, clubs, memberships and club events.

pub mod in_memory;
pub mod model;
pub mod postgres;
pub mod r#trait;

pub use in_memory::InMemoryStore;
pub use model::{
    Club, ClubDetails, ClubEvent, EventDetails, Member, Membership, NewUser, User, UserClub,
};
pub use postgres::PostgresStore;
pub use r#trait::{
    ClubDirectory, ClubEventStore, ClubStore, MembershipRoles, MembershipStore, StoreError,
    StoreTx, Transactional, UserStore,
};
