mod auth;
mod health_check;
mod posts;

use actix_web::{web, Scope};

use crate::configuration::JwtSettings;
use crate::middleware::JwtMiddleware;

pub use auth::{login, logout, protected, signup, toggle_active};
pub use health_check::health_check;
pub use posts::{
    add_comment, create_post, delete_comment, delete_post, get_post, list_posts, list_user_posts,
    status, update_post,
};

/// `/auth` routes; everything except signup and login requires a token
pub fn auth_scope(jwt_config: &JwtSettings) -> Scope {
    web::scope("/auth")
        .route("/signup", web::post().to(signup))
        .route("/login", web::post().to(login))
        .service(
            web::resource("/logout")
                .wrap(JwtMiddleware::new(jwt_config.clone()))
                .route(web::post().to(logout)),
        )
        .service(
            web::resource("/protected")
                .wrap(JwtMiddleware::new(jwt_config.clone()))
                .route(web::get().to(protected)),
        )
        .service(
            web::resource("/active")
                .wrap(JwtMiddleware::new(jwt_config.clone()))
                .route(web::patch().to(toggle_active)),
        )
}

/// `/posts` routes; write handlers authenticate through the `Identity` extractor
pub fn posts_scope() -> Scope {
    // fixed segments before `{post_id}`
    web::scope("/posts")
        .route("", web::get().to(status))
        .route("", web::post().to(create_post))
        .route("/all", web::get().to(list_posts))
        .route("/user/{user_id}", web::get().to(list_user_posts))
        .route("/{post_id}", web::get().to(get_post))
        .route("/{post_id}", web::put().to(update_post))
        .route("/{post_id}", web::delete().to(delete_post))
        .route("/{post_id}/comments", web::post().to(add_comment))
        .route("/{post_id}/{comment_id}", web::delete().to(delete_comment))
}
