pub mod admins;
pub mod events;
pub mod faculties;
pub mod registrations;
pub mod students;
