mod appointments;
mod doctors;
mod health_check;

pub use appointments::*;
pub use doctors::*;
pub use health_check::*;

use actix_web::web;

use crate::scheduler::AppointmentScheduler;
use crate::store::MemoryStore;

pub type SharedScheduler = web::Data<AppointmentScheduler<MemoryStore>>;
