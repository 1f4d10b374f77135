//! # Repository Module
//!
//! Database repository implementations for Vend.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Service layer                                                          │
//! │       │                                                                 │
//! │       │  db.orders().get_detail(id)                                     │
//! │       ▼                                                                 │
//! │  OrderRepository                                                        │
//! │  ├── insert / update (targeted merge)                                   │
//! │  ├── get_by_id / get_detail / list_detail                               │
//! │  └── aggregate_day / top_selling                                        │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SQLite Database                                                        │
//! │                                                                         │
//! │  SQL is isolated here; repositories are cheap to clone and are          │
//! │  handed to components through constructors.                             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`customer::CustomerRepository`] - Customer lookups (entity store)
//! - [`product::ProductRepository`] - Product lookups, batched set query
//! - [`order::OrderRepository`] - Order writes, denormalized reads,
//!   day-window aggregation

pub mod customer;
pub mod order;
pub mod product;
