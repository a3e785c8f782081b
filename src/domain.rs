pub mod entities;
pub mod use_cases;
pub mod timer;
pub mod carousel;
pub mod dropdown;
