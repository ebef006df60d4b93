// Static league data: the ranked player list and team names.

pub mod players;
pub mod teams;
