pub mod domain;
pub mod ports;
pub mod services;
pub mod week;

pub use domain::{
    Identity, Log, Room, RoomId, Student, UpsertOutcome, User, UserId, ValidationError, Week,
};
pub use ports::{AttendanceStore, IdentityProvider, PortError, PortResult};
pub use services::{
    AttendanceService, RoomService, ServiceError, ServiceResult, StudentDirectory, UserDirectory,
};
pub use week::{Clock, FixedClock, SystemClock, WeekId};
