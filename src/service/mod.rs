//! CrudService: the resource contract over any repository.

mod crud;
pub use crud::CrudService;
