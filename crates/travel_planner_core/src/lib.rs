pub mod codec;
pub mod domain;
pub mod ports;
pub mod validation;

pub use domain::{
    Feedback, NewFeedback, NewPhoto, NewSchedule, NewUser, Photo, ProfileUpdate, ScheduleKind,
    TravelSchedule, User, UserCredentials,
};
pub use ports::{DatabaseService, PortError, PortResult, UniqueKey};
