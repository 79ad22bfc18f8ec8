pub(crate) mod analyze;
pub(crate) mod compare;
pub(crate) mod publish;

pub(crate) use analyze::handle_analyze;
pub(crate) use compare::handle_compare;
pub(crate) use publish::handle_publish;
