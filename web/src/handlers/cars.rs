//! Car endpoints.
//!
//! Handlers only extract, delegate to a command and shape the response. Each
//! request runs under its own cancellation token: a child of the server's
//! shutdown token, cancelled when the handler future is dropped because the
//! client went away.

use crate::WebResult;
use crate::responses::CreatedAtRoute;
use crate::state::AppState;
use axum::{
    Json,
    extract::{
        Path, Query, State,
        rejection::{JsonRejection, PathRejection, QueryRejection},
    },
    http::StatusCode,
};
use car_boilerplate_core::{CarId, CarView, Page, PageOptions, SaveCar};

/// `POST /cars`: create a car and answer `201 Created` with a `Location`
/// pointing at the new resource.
///
/// # Errors
///
/// `400`/`415`/`422` for an unusable body, `503` if the store is unavailable
/// or the request is cancelled.
pub async fn post_car(
    State(state): State<AppState>,
    payload: Result<Json<SaveCar>, JsonRejection>,
) -> WebResult<CreatedAtRoute<CarView>> {
    let Json(save_car) = payload?;
    let cancel = state.request_token();
    let _guard = cancel.clone().drop_guard();

    Ok(state.commands.post_car.execute(&save_car, &cancel).await?)
}

/// `GET /cars/{carId}`
///
/// # Errors
///
/// `404` if the car does not exist.
pub async fn get_car(
    State(state): State<AppState>,
    car_id: Result<Path<CarId>, PathRejection>,
) -> WebResult<Json<CarView>> {
    let Path(car_id) = car_id?;
    let cancel = state.request_token();
    let _guard = cancel.clone().drop_guard();

    Ok(Json(state.commands.get_car.execute(car_id, &cancel).await?))
}

/// `GET /cars?page=&count=`
///
/// # Errors
///
/// `400` for out-of-range paging options, `404` for a page past the end.
pub async fn get_car_page(
    State(state): State<AppState>,
    options: Result<Query<PageOptions>, QueryRejection>,
) -> WebResult<Json<Page<CarView>>> {
    let Query(options) = options?;
    let cancel = state.request_token();
    let _guard = cancel.clone().drop_guard();

    Ok(Json(
        state.commands.get_car_page.execute(options, &cancel).await?,
    ))
}

/// `PUT /cars/{carId}`
///
/// # Errors
///
/// `404` if the car does not exist, `400`/`415`/`422` for an unusable body.
pub async fn put_car(
    State(state): State<AppState>,
    car_id: Result<Path<CarId>, PathRejection>,
    payload: Result<Json<SaveCar>, JsonRejection>,
) -> WebResult<Json<CarView>> {
    let Path(car_id) = car_id?;
    let Json(save_car) = payload?;
    let cancel = state.request_token();
    let _guard = cancel.clone().drop_guard();

    Ok(Json(
        state
            .commands
            .put_car
            .execute(car_id, &save_car, &cancel)
            .await?,
    ))
}

/// `DELETE /cars/{carId}`: `204 No Content` on success.
///
/// # Errors
///
/// `404` if the car does not exist.
pub async fn delete_car(
    State(state): State<AppState>,
    car_id: Result<Path<CarId>, PathRejection>,
) -> WebResult<StatusCode> {
    let Path(car_id) = car_id?;
    let cancel = state.request_token();
    let _guard = cancel.clone().drop_guard();

    state.commands.delete_car.execute(car_id, &cancel).await?;
    Ok(StatusCode::NO_CONTENT)
}
