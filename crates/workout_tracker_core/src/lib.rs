pub mod credential;
pub mod domain;
pub mod memory;
pub mod ports;
pub mod services;
pub mod token;
pub mod validation;

pub use credential::{CredentialError, Password};
pub use domain::{
    Identity, NewAccount, NewUser, ProfilePatch, User, Workout, WorkoutEntry, WorkoutPatch,
};
pub use ports::{PortError, PortResult, TokenStore, UserStore, WorkoutStore};
pub use services::{AccountService, ServiceError, ServiceResult, WorkoutService};
pub use token::{Token, TokenError, TokenService, SCOPE_AUTHENTICATION};
