mod expire_lots;
mod scheduler;

pub use expire_lots::ExpireLotsJob;
pub use scheduler::JobScheduler;
