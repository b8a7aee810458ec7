use axum::{
    extract::{Extension, Json, Path, State},
    http::StatusCode,
};
use uuid::Uuid;

use crate::{
    AppState,
    database::models::{NewOrder, Order, OrderStatus},
    error::AppError,
    middleware::CurrentUser,
    result::{ApiResponse, ApiResult, Message},
    utils::success_to_api_response,
};

use super::model::{
    AdminOrdersResponse, OrderDetailsResponse, OrderResponse, OrdersResponse, OwnerInfo,
    UpdateStatusRequest,
};

fn not_found() -> AppError {
    AppError::NotFound("Order not found".into())
}

async fn load(state: &AppState, id: Uuid) -> Result<Order, AppError> {
    state.orders.find_by_id(id).await?.ok_or_else(not_found)
}

/// Stock deltas that undo (`sign = 1`) or apply (`sign = -1`) an order.
fn stock_deltas(order: &Order, sign: i32) -> Vec<(Uuid, i32)> {
    order
        .order_items
        .iter()
        .map(|item| (item.product, sign * item.quantity))
        .collect()
}

/// Moves `order` to `status`, giving stock back when it becomes cancelled.
async fn change_status(
    state: &AppState,
    mut order: Order,
    status: OrderStatus,
) -> Result<Order, AppError> {
    let was_cancelled = order.order_status == OrderStatus::Cancelled;
    if was_cancelled && status != OrderStatus::Cancelled {
        return Err(AppError::Validation(
            "Cancelled orders cannot be reopened".into(),
        ));
    }
    order.transition(status).map_err(AppError::Validation)?;
    if !state.orders.save_status(&order).await? {
        return Err(not_found());
    }
    if status == OrderStatus::Cancelled && !was_cancelled {
        state
            .catalog_mutations
            .adjust_stock(&stock_deltas(&order, 1))
            .await?;
    }
    tracing::info!(order_id = %order.id, status = %order.order_status, "order status changed");
    Ok(order)
}

#[axum::debug_handler]
pub async fn new_order(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Json(req): Json<NewOrder>,
) -> Result<(StatusCode, Json<ApiResponse<OrderResponse>>), AppError> {
    req.validate().map_err(AppError::Validation)?;

    // Stock is taken before the order is stored and given back if the insert fails.
    let order = Order::place(user.id, req);
    state
        .catalog_mutations
        .adjust_stock(&stock_deltas(&order, -1))
        .await?;
    if let Err(e) = state.orders.insert(&order).await {
        if let Err(restore) = state
            .catalog_mutations
            .adjust_stock(&stock_deltas(&order, 1))
            .await
        {
            tracing::error!(order_id = %order.id, error = %restore, "failed to restore stock for unsaved order");
        }
        return Err(e.into());
    }

    tracing::info!(order_id = %order.id, user_id = %user.id, "order placed");
    Ok((
        StatusCode::CREATED,
        success_to_api_response(OrderResponse { order }),
    ))
}

/// Visible to its owner and to admins.
#[axum::debug_handler]
pub async fn order_details(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
) -> ApiResult<OrderDetailsResponse> {
    let order = load(&state, id).await?;
    if order.user != user.id && !user.is_admin() {
        return Err(not_found());
    }

    let owner = state
        .users
        .find_by_id(order.user)
        .await?
        .map(|owner| OwnerInfo {
            name: owner.full_name,
            email: owner.email,
        });
    Ok(success_to_api_response(OrderDetailsResponse { order, owner }))
}

#[axum::debug_handler]
pub async fn my_orders(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
) -> ApiResult<OrdersResponse> {
    let orders = state.orders.list_by_user(user.id).await?;
    Ok(success_to_api_response(OrdersResponse { orders }))
}

/// Owners may cancel while the order is still processing.
#[axum::debug_handler]
pub async fn cancel_order(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
) -> ApiResult<OrderResponse> {
    let order = load(&state, id).await?;
    if order.user != user.id {
        return Err(not_found());
    }
    if order.order_status != OrderStatus::Processing {
        return Err(AppError::Validation(format!(
            "Order is already {} and can no longer be cancelled",
            order.order_status
        )));
    }

    let order = change_status(&state, order, OrderStatus::Cancelled).await?;
    Ok(success_to_api_response(OrderResponse { order }))
}

#[axum::debug_handler]
pub async fn all_orders(State(state): State<AppState>) -> ApiResult<AdminOrdersResponse> {
    let orders = state.orders.list_all().await?;
    Ok(success_to_api_response(AdminOrdersResponse::new(orders)))
}

#[axum::debug_handler]
pub async fn update_order_status(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateStatusRequest>,
) -> ApiResult<OrderResponse> {
    let order = load(&state, id).await?;
    let order = change_status(&state, order, req.status).await?;
    Ok(success_to_api_response(OrderResponse { order }))
}

#[axum::debug_handler]
pub async fn delete_order(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Message> {
    if !state.orders.delete(id).await? {
        return Err(not_found());
    }
    Ok(success_to_api_response(Message::new("Order deleted successfully")))
}
