mod arena;
mod cursor;
mod handle;
mod node;
mod raw_ostree_map;
mod size;

pub(crate) use arena::Arena;
pub(crate) use cursor::InOrder;
pub(crate) use handle::Handle;
pub(crate) use node::Node;
pub(crate) use raw_ostree_map::RawOSTreeMap;
