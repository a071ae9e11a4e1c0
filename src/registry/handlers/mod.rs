pub mod alarm;
pub mod audio;
pub mod cab;
pub mod call;
pub mod music;
pub mod payment;
pub mod setting;
