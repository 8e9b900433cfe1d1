use uuid::Uuid;

use storefront_domain::pagination::PageRequest;

use crate::domain::repository::OrderRepository;
use crate::domain::types::Order;
use crate::error::StoreServiceError;

// ── GetOrder ─────────────────────────────────────────────────────────────────

pub struct GetOrderUseCase<R: OrderRepository> {
    pub repo: R,
}

impl<R: OrderRepository> GetOrderUseCase<R> {
    /// Orders of other users are reported as missing.
    pub async fn execute(&self, user_id: Uuid, order_id: Uuid) -> Result<Order, StoreServiceError> {
        self.repo
            .find_order(order_id)
            .await?
            .filter(|order| order.user_id == user_id)
            .ok_or(StoreServiceError::OrderNotFound)
    }
}

// ── GetOrders ────────────────────────────────────────────────────────────────

pub struct GetOrdersUseCase<R: OrderRepository> {
    pub repo: R,
}

impl<R: OrderRepository> GetOrdersUseCase<R> {
    pub async fn execute(
        &self,
        user_id: Uuid,
        page: PageRequest,
    ) -> Result<Vec<Order>, StoreServiceError> {
        self.repo.list_orders(user_id, page.clamped()).await
    }
}
