pub mod action_names;
pub mod stash_paths;
pub mod state_names;
