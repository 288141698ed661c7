//! Route table for the `/api` scope.
//!
//! `/users/profile` is registered ahead of `/users/{id}` so the literal
//! segment wins.

use actix_web::web;

use super::courses::{
    create_course, delete_course, drop_course, get_course, list_courses, register_for_course,
    update_course,
};
use super::error::json_error_handler;
use super::health::welcome;
use super::results::{
    course_results, delete_result, list_results, record_result, student_transcript,
    update_result,
};
use super::users::{
    delete_user, get_profile, get_user, list_users, login, logout, register, update_profile,
    update_user,
};

/// Register every `/api` handler and the JSON error handler on `cfg`.
///
/// # Examples
/// ```
/// use actix_web::{App, web};
/// use portal::inbound::http::routes::configure;
///
/// let _app = App::new().service(web::scope("/api").configure(configure));
/// ```
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::JsonConfig::default().error_handler(json_error_handler))
        .service(welcome)
        .service(register)
        .service(login)
        .service(logout)
        .service(get_profile)
        .service(update_profile)
        .service(list_users)
        .service(get_user)
        .service(update_user)
        .service(delete_user)
        .service(create_course)
        .service(list_courses)
        .service(get_course)
        .service(update_course)
        .service(delete_course)
        .service(register_for_course)
        .service(drop_course)
        .service(record_result)
        .service(list_results)
        .service(student_transcript)
        .service(course_results)
        .service(update_result)
        .service(delete_result);
}
