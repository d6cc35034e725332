pub mod takeoutfix_core;
