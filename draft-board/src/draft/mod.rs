// Draft model: pick keys, serpentine order, and pick state.

pub mod order;
pub mod pick;
pub mod state;
