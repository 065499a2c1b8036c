//! Domain services behind the contact route.
//!
//! ARCHITECTURE
//! ============
//! `submission` turns a decoded request body into a validated record;
//! `mail` turns that record into a notification and delivers it. The route
//! handler only translates between HTTP and these two steps.

pub mod mail;
pub mod submission;
