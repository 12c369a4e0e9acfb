//! Route paths.

pub const POST_USERS_REGISTER: &str = "/api/users/register";
pub const POST_USERS_LOGIN: &str = "/api/users/login";

pub const AUTHORS: &str = "/api/authors";
pub const AUTHORS_ID: &str = "/api/authors/{id}";

pub const BOOKS: &str = "/api/books";
pub const BOOKS_ID: &str = "/api/books/{id}";
