use actix_web::{web, HttpResponse};
use log::debug;
use mongodb::bson::oid::ObjectId;

use crate::auth::{PasswordHasher, TokenIssuer};
use crate::error::ApiError;
use crate::models::{
    LoginInput, LoginResponse, MessageResponse, RegisterInput, ServerStatus, TopRatedQuery, User,
};
use crate::store::{ProductStore, UserStore};

/// Mounts every route. Stores, hasher and issuer are expected as app data.
pub fn configure<U, P>(cfg: &mut web::ServiceConfig)
where
    U: UserStore + 'static,
    P: ProductStore + 'static,
{
    cfg.app_data(
        web::JsonConfig::default()
            .error_handler(|err, _req| ApiError::MalformedBody(err.to_string()).into()),
    )
    .app_data(
        web::QueryConfig::default()
            .error_handler(|err, _req| ApiError::MalformedBody(err.to_string()).into()),
    )
    .route("/", web::get().to(server_status))
    .service(
        web::scope("/api/v1")
            .route("/register", web::post().to(register::<U>))
            .route("/login", web::post().to(login::<U>))
            .route("/products", web::get().to(all_products::<P>))
            .route("/products/{productid}", web::get().to(product_by_id::<P>))
            .route("/flashsale", web::get().to(flash_sale::<P>))
            .route("/topRatedProducts", web::get().to(top_rated::<P>)),
    );
}

async fn server_status() -> HttpResponse {
    HttpResponse::Ok().json(ServerStatus {
        message: "Server is running smoothly",
        timestamp: chrono::Utc::now(),
    })
}

async fn register<U: UserStore>(
    users: web::Data<U>,
    hasher: web::Data<PasswordHasher>,
    input: web::Json<RegisterInput>,
) -> Result<HttpResponse, ApiError> {
    let RegisterInput {
        name,
        email,
        password,
    } = input.into_inner();

    if users.find_by_email(&email).await?.is_some() {
        debug!("Registration refused, {email} already exists");
        return Err(ApiError::DuplicateUser);
    }

    let hasher = hasher.get_ref().clone();
    let password_hash = web::block(move || hasher.hash(&password))
        .await
        .map_err(|e| ApiError::internal("Hashing task failed", e))?
        .map_err(|e| ApiError::internal("Password hashing failed", e))?;

    // A concurrent registration that slipped past the check above is caught
    // here as StoreError::Duplicate.
    users
        .insert(&User {
            name,
            email: email.clone(),
            password_hash,
        })
        .await?;
    debug!("Registered {email}");

    Ok(HttpResponse::Created().json(MessageResponse {
        success: true,
        message: "User registered successfully",
    }))
}

async fn login<U: UserStore>(
    users: web::Data<U>,
    issuer: web::Data<TokenIssuer>,
    input: web::Json<LoginInput>,
) -> Result<HttpResponse, ApiError> {
    let LoginInput { email, password } = input.into_inner();

    let Some(user) = users.find_by_email(&email).await? else {
        debug!("Login failed for {email}: no such user");
        return Err(ApiError::InvalidCredentials);
    };

    let stored = user.password_hash;
    let matches = web::block(move || PasswordHasher::verify(&stored, &password))
        .await
        .map_err(|e| ApiError::internal("Verification task failed", e))?;
    if !matches {
        debug!("Login failed for {email}: password mismatch");
        return Err(ApiError::InvalidCredentials);
    }

    let token = issuer
        .issue(&user.email)
        .map_err(|e| ApiError::internal("Failed to encode token", e))?;

    Ok(HttpResponse::Ok().json(LoginResponse {
        success: true,
        message: "Login successful",
        token,
    }))
}

async fn all_products<P: ProductStore>(products: web::Data<P>) -> Result<HttpResponse, ApiError> {
    Ok(HttpResponse::Ok().json(products.all().await?))
}

async fn product_by_id<P: ProductStore>(
    products: web::Data<P>,
    product_id: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let id = ObjectId::parse_str(product_id.as_str()).map_err(|_| ApiError::InvalidId)?;
    match products.by_id(id).await? {
        Some(product) => Ok(HttpResponse::Ok().json(product)),
        None => Err(ApiError::NotFound),
    }
}

async fn flash_sale<P: ProductStore>(products: web::Data<P>) -> Result<HttpResponse, ApiError> {
    Ok(HttpResponse::Ok().json(products.flash_sale().await?))
}

async fn top_rated<P: ProductStore>(
    products: web::Data<P>,
    query: web::Query<TopRatedQuery>,
) -> Result<HttpResponse, ApiError> {
    Ok(HttpResponse::Ok().json(products.top_rated(query.limit()).await?))
}
