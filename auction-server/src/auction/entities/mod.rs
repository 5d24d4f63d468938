mod bid;
mod schedule;
mod session;

pub use {
    bid::*,
    schedule::*,
    session::*,
};
