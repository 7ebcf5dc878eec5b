pub mod contribution_graph;
pub mod projection;
