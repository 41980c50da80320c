mod domain;
pub use domain::*;

mod names;
pub use names::{
    NameError, validate_instance_name, validate_queue_name, validate_task_type_name,
    validate_whitelist_name,
};
