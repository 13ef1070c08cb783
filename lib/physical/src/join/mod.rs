mod left;
mod unbound;

pub use left::LeftJoin;
pub use unbound::UnboundJoin;
