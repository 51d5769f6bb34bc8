//! Read-only views of the content tree, for checking what an import wrote.

use rocket::serde::json::Json;
use rocket::{State, get};
use rocket_okapi::openapi;

use crate::auth::{BearerToken, SharedAuthorizer};
use crate::error::ApiError;
use crate::models::{Category, Course, DataResponse, Problem};
use crate::store::SharedStore;

fn require_authorized(token: &BearerToken, authorizer: &SharedAuthorizer) -> Result<(), ApiError> {
    if authorizer.is_authorized(token.as_deref()) {
        Ok(())
    } else {
        Err(ApiError::Unauthorized("Invalid authentication".to_string()))
    }
}

/// List every course.
#[openapi(tag = "Content")]
#[get("/admin/courses")]
pub async fn list_courses(
    token: BearerToken,
    store: &State<SharedStore>,
    authorizer: &State<SharedAuthorizer>,
) -> Result<Json<DataResponse<Vec<Course>>>, ApiError> {
    require_authorized(&token, authorizer)?;
    let courses = store.list_courses().await?;
    Ok(Json(DataResponse { data: courses }))
}

/// List the categories of one course.
#[openapi(tag = "Content")]
#[get("/admin/courses/<course_id>/categories")]
pub async fn list_categories(
    course_id: i32,
    token: BearerToken,
    store: &State<SharedStore>,
    authorizer: &State<SharedAuthorizer>,
) -> Result<Json<DataResponse<Vec<Category>>>, ApiError> {
    require_authorized(&token, authorizer)?;
    let categories = store.find_categories_by_course(course_id).await?;
    Ok(Json(DataResponse { data: categories }))
}

/// List the problems of one category.
#[openapi(tag = "Content")]
#[get("/admin/categories/<category_id>/problems")]
pub async fn list_problems(
    category_id: i32,
    token: BearerToken,
    store: &State<SharedStore>,
    authorizer: &State<SharedAuthorizer>,
) -> Result<Json<DataResponse<Vec<Problem>>>, ApiError> {
    require_authorized(&token, authorizer)?;
    let problems = store.find_problems_by_category(category_id).await?;
    Ok(Json(DataResponse { data: problems }))
}
