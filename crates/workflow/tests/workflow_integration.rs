//! End-to-end workflow tests over the in-memory store.

use common::{Money, OrderId, ProductId, UserId};
use domain::{
    CustomerStatus, DomainError, FollowType, MirrorPolicy, OrderStatus, PaymentMethod,
    PaymentStatus, Product, ProductMaterial,
};
use store::{MemoryStore, Store, StoreTransaction};
use workflow::{
    CompleteOrder, ConfirmPayment, CreateCustomer, CreateOrderFromProduct, SignOrder, StartOrder,
    UpdateOrderMaterial, WorkflowError, WorkflowService,
};

fn service() -> WorkflowService<MemoryStore> {
    WorkflowService::new(MemoryStore::new())
}

/// Seeds a product template with one line item per `(quantity, price_yuan)`.
async fn seed_product(
    service: &WorkflowService<MemoryStore>,
    lines: &[(u32, i64)],
) -> ProductId {
    let product = Product::new("全包套餐A", Money::from_yuan(50000), Money::from_yuan(38000));
    let product_id = product.id;

    let mut tx = service.store().begin().await.unwrap();
    tx.insert_product(&product).await.unwrap();
    for (i, (quantity, price)) in lines.iter().enumerate() {
        let material = ProductMaterial::new(
            product_id,
            format!("M-{:03}", i + 1),
            "瓷砖",
            "主材",
            *quantity,
            "㎡",
            Money::from_yuan(*price),
        );
        tx.insert_product_material(&material).await.unwrap();
    }
    tx.commit().await.unwrap();
    product_id
}

async fn seed_customer(service: &WorkflowService<MemoryStore>, phone: &str) -> common::CustomerId {
    service
        .create_customer(CreateCustomer::new("张三", phone, UserId::new()))
        .await
        .unwrap()
        .data
        .customer_id
}

/// Moves an order from draft into pending, standing in for the quoting step
/// that lives outside this core.
async fn make_pending(service: &WorkflowService<MemoryStore>, order_id: OrderId) {
    let mut tx = service.store().begin().await.unwrap();
    let mut order = tx.order(order_id).await.unwrap().unwrap();
    order.status = OrderStatus::Pending;
    tx.update_order(&order).await.unwrap();
    tx.commit().await.unwrap();
}

async fn customer_status(
    service: &WorkflowService<MemoryStore>,
    id: common::CustomerId,
) -> CustomerStatus {
    let mut tx = service.store().begin().await.unwrap();
    tx.customer(id).await.unwrap().unwrap().status
}

mod customers {
    use super::*;

    #[tokio::test]
    async fn creates_customer_with_init_follow() {
        let service = service();

        let outcome = service
            .create_customer(CreateCustomer::new("张三", "13800000000", UserId::new()))
            .await
            .unwrap();
        assert_eq!(outcome.data.customer_name, "张三");

        assert_eq!(service.store().customer_count().await, 1);
        assert_eq!(service.store().follow_count().await, 1);

        let mut tx = service.store().begin().await.unwrap();
        let follows = tx
            .follows_for_customer(outcome.data.customer_id)
            .await
            .unwrap();
        assert_eq!(follows.len(), 1);
        assert_eq!(follows[0].follow_type, FollowType::Init);

        let customer = tx.customer(outcome.data.customer_id).await.unwrap().unwrap();
        assert_eq!(customer.status, CustomerStatus::Prospect);
    }

    #[tokio::test]
    async fn duplicate_phone_persists_nothing() {
        let service = service();
        seed_customer(&service, "13800000000").await;

        let err = service
            .create_customer(CreateCustomer::new("李四", "13800000000", UserId::new()))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            WorkflowError::Domain(DomainError::Duplicate { field: "phone", .. })
        ));

        // Neither a customer nor a follow row from the failed attempt.
        assert_eq!(service.store().customer_count().await, 1);
        assert_eq!(service.store().follow_count().await, 1);
    }

    #[tokio::test]
    async fn blank_name_and_phone_are_rejected() {
        let service = service();

        let err = service
            .create_customer(CreateCustomer::new("  ", "13800000000", UserId::new()))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            WorkflowError::Domain(DomainError::Validation { .. })
        ));

        let err = service
            .create_customer(CreateCustomer::new("张三", "", UserId::new()))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            WorkflowError::Domain(DomainError::Validation { .. })
        ));

        assert_eq!(service.store().customer_count().await, 0);
    }
}

mod orders {
    use super::*;

    #[tokio::test]
    async fn order_copies_template_and_sums_total() {
        let service = service();
        let customer_id = seed_customer(&service, "13800000000").await;
        let product_id = seed_product(&service, &[(2, 100), (4, 260)]).await;

        let outcome = service
            .create_order_from_product(CreateOrderFromProduct {
                customer_id,
                product_id,
                remark: None,
                user: UserId::new(),
            })
            .await
            .unwrap();

        assert!(outcome.data.order_no.starts_with("DD"));
        assert_eq!(outcome.data.order_no.len(), 14);
        // 2×100 + 4×260
        assert_eq!(outcome.data.total_amount, Money::from_yuan(1240));

        let mut tx = service.store().begin().await.unwrap();
        let order = tx.order(outcome.data.order_id).await.unwrap().unwrap();
        assert_eq!(order.status, OrderStatus::Draft);
        assert_eq!(order.cost_amount, Money::from_yuan(38000));
        assert_eq!(order.paid_amount, Money::zero());

        let materials = tx.order_materials(order.id).await.unwrap();
        assert_eq!(materials.len(), 2);
        assert!(materials.iter().all(|m| m.order_id == order.id));
        drop(tx);

        // Drafting an order promotes the customer to quoted.
        assert_eq!(
            customer_status(&service, customer_id).await,
            CustomerStatus::Quoted
        );
    }

    #[tokio::test]
    async fn missing_product_is_not_found() {
        let service = service();
        let customer_id = seed_customer(&service, "13800000000").await;

        let err = service
            .create_order_from_product(CreateOrderFromProduct {
                customer_id,
                product_id: ProductId::new(),
                remark: None,
                user: UserId::new(),
            })
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            WorkflowError::Domain(DomainError::NotFound {
                entity: "product",
                ..
            })
        ));
    }

    #[tokio::test]
    async fn empty_template_rolls_everything_back() {
        let service = service();
        let customer_id = seed_customer(&service, "13800000000").await;
        let product_id = seed_product(&service, &[]).await;

        let err = service
            .create_order_from_product(CreateOrderFromProduct {
                customer_id,
                product_id,
                remark: None,
                user: UserId::new(),
            })
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            WorkflowError::Domain(DomainError::Validation { .. })
        ));

        assert_eq!(service.store().order_count().await, 0);
        assert_eq!(service.store().order_material_count().await, 0);
        assert_eq!(
            customer_status(&service, customer_id).await,
            CustomerStatus::Prospect
        );
    }

    #[tokio::test]
    async fn material_update_recomputes_amount_and_total() {
        let service = service();
        let customer_id = seed_customer(&service, "13800000000").await;
        let product_id = seed_product(&service, &[(2, 100), (1, 50)]).await;

        let created = service
            .create_order_from_product(CreateOrderFromProduct {
                customer_id,
                product_id,
                remark: None,
                user: UserId::new(),
            })
            .await
            .unwrap();

        let mut tx = service.store().begin().await.unwrap();
        let materials = tx.order_materials(created.data.order_id).await.unwrap();
        let target = materials
            .iter()
            .find(|m| m.quantity == 2)
            .unwrap()
            .id;
        drop(tx);

        let outcome = service
            .update_order_material(UpdateOrderMaterial {
                material_id: target,
                quantity: 3,
                price: Money::from_yuan(100),
            })
            .await
            .unwrap();

        assert_eq!(outcome.data.amount, Money::from_yuan(300));
        // 3×100 + 1×50
        assert_eq!(outcome.data.total_amount, Money::from_yuan(350));

        let mut tx = service.store().begin().await.unwrap();
        let order = tx.order(created.data.order_id).await.unwrap().unwrap();
        assert_eq!(order.total_amount, Money::from_yuan(350));
    }

    #[tokio::test]
    async fn material_update_rejects_bad_input() {
        let service = service();

        let err = service
            .update_order_material(UpdateOrderMaterial {
                material_id: common::OrderMaterialId::new(),
                quantity: 0,
                price: Money::from_yuan(100),
            })
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            WorkflowError::Domain(DomainError::Validation { .. })
        ));

        let err = service
            .update_order_material(UpdateOrderMaterial {
                material_id: common::OrderMaterialId::new(),
                quantity: 1,
                price: Money::from_cents(-1),
            })
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            WorkflowError::Domain(DomainError::Validation { .. })
        ));
    }

    #[tokio::test]
    async fn sign_requires_pending_status() {
        let service = service();
        let customer_id = seed_customer(&service, "13800000000").await;
        let product_id = seed_product(&service, &[(2, 100)]).await;

        let created = service
            .create_order_from_product(CreateOrderFromProduct {
                customer_id,
                product_id,
                remark: None,
                user: UserId::new(),
            })
            .await
            .unwrap();

        // Still a draft.
        let err = service
            .sign_order(SignOrder {
                order_id: created.data.order_id,
                deposit_amount: None,
                method: None,
                user: UserId::new(),
            })
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            WorkflowError::Domain(DomainError::StateConflict {
                entity: "order",
                action: "sign",
                ..
            })
        ));

        let mut tx = service.store().begin().await.unwrap();
        let order = tx.order(created.data.order_id).await.unwrap().unwrap();
        assert_eq!(order.status, OrderStatus::Draft);
        assert!(order.signed_at.is_none());
        drop(tx);
        assert_eq!(service.store().payment_count().await, 0);
    }

    #[tokio::test]
    async fn sign_with_deposit_records_pending_payment() {
        let service = service();
        let customer_id = seed_customer(&service, "13800000000").await;
        let product_id = seed_product(&service, &[(2, 100)]).await;

        let created = service
            .create_order_from_product(CreateOrderFromProduct {
                customer_id,
                product_id,
                remark: None,
                user: UserId::new(),
            })
            .await
            .unwrap();
        make_pending(&service, created.data.order_id).await;

        let signed = service
            .sign_order(SignOrder {
                order_id: created.data.order_id,
                deposit_amount: Some(Money::from_yuan(500)),
                method: Some(PaymentMethod::Wechat),
                user: UserId::new(),
            })
            .await
            .unwrap();
        let payment_no = signed.data.payment_no.expect("deposit ledger number");
        assert!(payment_no.starts_with("SK"));
        assert_eq!(payment_no.len(), 14);

        let mut tx = service.store().begin().await.unwrap();
        let order = tx.order(created.data.order_id).await.unwrap().unwrap();
        assert_eq!(order.status, OrderStatus::Signed);
        assert!(order.signed_at.is_some());
        // Recording the deposit does not pay it.
        assert_eq!(order.paid_amount, Money::zero());

        let payments = tx.payments_for_order(order.id).await.unwrap();
        assert_eq!(payments.len(), 1);
        assert!(payments[0].payment_no.starts_with("SK"));
        assert_eq!(payments[0].status, PaymentStatus::Pending);
        assert_eq!(payments[0].amount, Money::from_yuan(500));
        assert_eq!(payments[0].method, PaymentMethod::Wechat);
        drop(tx);

        assert_eq!(
            customer_status(&service, customer_id).await,
            CustomerStatus::Signed
        );
    }

    #[tokio::test]
    async fn sign_without_deposit_records_no_payment() {
        let service = service();
        let customer_id = seed_customer(&service, "13800000000").await;
        let product_id = seed_product(&service, &[(2, 100)]).await;

        let created = service
            .create_order_from_product(CreateOrderFromProduct {
                customer_id,
                product_id,
                remark: None,
                user: UserId::new(),
            })
            .await
            .unwrap();
        make_pending(&service, created.data.order_id).await;

        let signed = service
            .sign_order(SignOrder {
                order_id: created.data.order_id,
                deposit_amount: Some(Money::zero()),
                method: None,
                user: UserId::new(),
            })
            .await
            .unwrap();

        assert!(signed.data.payment_no.is_none());
        assert_eq!(service.store().payment_count().await, 0);
    }

    #[tokio::test]
    async fn negative_deposit_is_rejected() {
        let service = service();

        let err = service
            .sign_order(SignOrder {
                order_id: OrderId::new(),
                deposit_amount: Some(Money::from_yuan(-1)),
                method: None,
                user: UserId::new(),
            })
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            WorkflowError::Domain(DomainError::Validation { .. })
        ));
    }

    #[tokio::test]
    async fn start_and_complete_walk_the_lifecycle() {
        let service = service();
        let customer_id = seed_customer(&service, "13800000000").await;
        let product_id = seed_product(&service, &[(2, 100)]).await;

        let created = service
            .create_order_from_product(CreateOrderFromProduct {
                customer_id,
                product_id,
                remark: None,
                user: UserId::new(),
            })
            .await
            .unwrap();
        make_pending(&service, created.data.order_id).await;

        service
            .sign_order(SignOrder {
                order_id: created.data.order_id,
                deposit_amount: None,
                method: None,
                user: UserId::new(),
            })
            .await
            .unwrap();

        let foreman = UserId::new();
        service
            .start_order(StartOrder {
                order_id: created.data.order_id,
                foreman_id: Some(foreman),
            })
            .await
            .unwrap();

        let mut tx = service.store().begin().await.unwrap();
        let order = tx.order(created.data.order_id).await.unwrap().unwrap();
        assert_eq!(order.status, OrderStatus::InProgress);
        assert_eq!(order.foreman_id, Some(foreman));
        assert!(order.started_at.is_some());
        drop(tx);
        // Starting work is not a customer milestone.
        assert_eq!(
            customer_status(&service, customer_id).await,
            CustomerStatus::Signed
        );

        service
            .complete_order(CompleteOrder {
                order_id: created.data.order_id,
            })
            .await
            .unwrap();

        let mut tx = service.store().begin().await.unwrap();
        let order = tx.order(created.data.order_id).await.unwrap().unwrap();
        assert_eq!(order.status, OrderStatus::Completed);
        assert!(order.completed_at.is_some());
        drop(tx);
        assert_eq!(
            customer_status(&service, customer_id).await,
            CustomerStatus::Completed
        );
    }

    #[tokio::test]
    async fn start_requires_signed_status() {
        let service = service();
        let customer_id = seed_customer(&service, "13800000000").await;
        let product_id = seed_product(&service, &[(2, 100)]).await;

        let created = service
            .create_order_from_product(CreateOrderFromProduct {
                customer_id,
                product_id,
                remark: None,
                user: UserId::new(),
            })
            .await
            .unwrap();

        let err = service
            .start_order(StartOrder {
                order_id: created.data.order_id,
                foreman_id: None,
            })
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            WorkflowError::Domain(DomainError::StateConflict {
                action: "start",
                ..
            })
        ));
    }
}

mod payments {
    use super::*;

    /// Creates a signed order with a pending 500 yuan deposit and returns
    /// `(order_id, payment_id)`.
    async fn signed_with_deposit(
        service: &WorkflowService<MemoryStore>,
    ) -> (OrderId, common::PaymentId) {
        let customer_id = seed_customer(service, "13800000000").await;
        let product_id = seed_product(service, &[(2, 100)]).await;

        let created = service
            .create_order_from_product(CreateOrderFromProduct {
                customer_id,
                product_id,
                remark: None,
                user: UserId::new(),
            })
            .await
            .unwrap();
        make_pending(service, created.data.order_id).await;

        service
            .sign_order(SignOrder {
                order_id: created.data.order_id,
                deposit_amount: Some(Money::from_yuan(500)),
                method: None,
                user: UserId::new(),
            })
            .await
            .unwrap();

        let mut tx = service.store().begin().await.unwrap();
        let payments = tx.payments_for_order(created.data.order_id).await.unwrap();
        (created.data.order_id, payments[0].id)
    }

    #[tokio::test]
    async fn confirm_applies_amount_to_order() {
        let service = service();
        let (order_id, payment_id) = signed_with_deposit(&service).await;

        let outcome = service
            .confirm_payment(ConfirmPayment {
                payment_id,
                paid_at: None,
            })
            .await
            .unwrap();

        assert_eq!(outcome.data.paid_amount, Money::from_yuan(500));
        assert_eq!(outcome.data.total_amount, Money::from_yuan(200));
        // Overpayment is not clamped.
        assert_eq!(outcome.data.unpaid_amount, Money::from_yuan(-300));

        let mut tx = service.store().begin().await.unwrap();
        let payment = tx.payment(payment_id).await.unwrap().unwrap();
        assert_eq!(payment.status, PaymentStatus::Confirmed);
        assert!(payment.paid_at.is_some());

        let order = tx.order(order_id).await.unwrap().unwrap();
        assert_eq!(order.paid_amount, Money::from_yuan(500));
    }

    #[tokio::test]
    async fn double_confirm_does_not_double_count() {
        let service = service();
        let (order_id, payment_id) = signed_with_deposit(&service).await;

        service
            .confirm_payment(ConfirmPayment {
                payment_id,
                paid_at: None,
            })
            .await
            .unwrap();

        let err = service
            .confirm_payment(ConfirmPayment {
                payment_id,
                paid_at: None,
            })
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            WorkflowError::Domain(DomainError::PaymentAlreadyConfirmed)
        ));

        let mut tx = service.store().begin().await.unwrap();
        let order = tx.order(order_id).await.unwrap().unwrap();
        assert_eq!(order.paid_amount, Money::from_yuan(500));
    }

    #[tokio::test]
    async fn missing_payment_is_not_found() {
        let service = service();

        let err = service
            .confirm_payment(ConfirmPayment {
                payment_id: common::PaymentId::new(),
                paid_at: None,
            })
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            WorkflowError::Domain(DomainError::NotFound {
                entity: "payment",
                ..
            })
        ));
    }
}

mod mirror {
    use super::*;

    #[tokio::test]
    async fn customer_status_never_regresses() {
        let service = service();
        let customer_id = seed_customer(&service, "13800000000").await;
        let product_id = seed_product(&service, &[(2, 100)]).await;

        // Walk the first order all the way to completed.
        let first = service
            .create_order_from_product(CreateOrderFromProduct {
                customer_id,
                product_id,
                remark: None,
                user: UserId::new(),
            })
            .await
            .unwrap();
        make_pending(&service, first.data.order_id).await;
        service
            .sign_order(SignOrder {
                order_id: first.data.order_id,
                deposit_amount: None,
                method: None,
                user: UserId::new(),
            })
            .await
            .unwrap();
        service
            .start_order(StartOrder {
                order_id: first.data.order_id,
                foreman_id: None,
            })
            .await
            .unwrap();
        service
            .complete_order(CompleteOrder {
                order_id: first.data.order_id,
            })
            .await
            .unwrap();
        assert_eq!(
            customer_status(&service, customer_id).await,
            CustomerStatus::Completed
        );

        // A new draft for the same customer must not pull them back.
        service
            .create_order_from_product(CreateOrderFromProduct {
                customer_id,
                product_id,
                remark: None,
                user: UserId::new(),
            })
            .await
            .unwrap();
        assert_eq!(
            customer_status(&service, customer_id).await,
            CustomerStatus::Completed
        );
    }

    #[tokio::test]
    async fn disabled_policy_leaves_customer_untouched() {
        let service =
            WorkflowService::with_mirror_policy(MemoryStore::new(), MirrorPolicy::disabled());
        let customer_id = seed_customer(&service, "13800000000").await;
        let product_id = seed_product(&service, &[(2, 100)]).await;

        service
            .create_order_from_product(CreateOrderFromProduct {
                customer_id,
                product_id,
                remark: None,
                user: UserId::new(),
            })
            .await
            .unwrap();

        assert_eq!(
            customer_status(&service, customer_id).await,
            CustomerStatus::Prospect
        );
    }
}

mod end_to_end {
    use super::*;

    /// Intake through overpaid deposit, in one pass.
    #[tokio::test]
    async fn full_lifecycle_with_overpaid_deposit() {
        let service = service();

        let customer = service
            .create_customer(CreateCustomer::new("张三", "13800000000", UserId::new()))
            .await
            .unwrap();
        let product_id = seed_product(&service, &[(2, 100)]).await;

        let created = service
            .create_order_from_product(CreateOrderFromProduct {
                customer_id: customer.data.customer_id,
                product_id,
                remark: Some("全屋翻新".to_string()),
                user: UserId::new(),
            })
            .await
            .unwrap();
        assert_eq!(created.data.total_amount, Money::from_yuan(200));

        let mut tx = service.store().begin().await.unwrap();
        let material_id = tx.order_materials(created.data.order_id).await.unwrap()[0].id;
        drop(tx);

        let updated = service
            .update_order_material(UpdateOrderMaterial {
                material_id,
                quantity: 3,
                price: Money::from_yuan(100),
            })
            .await
            .unwrap();
        assert_eq!(updated.data.total_amount, Money::from_yuan(300));

        make_pending(&service, created.data.order_id).await;
        service
            .sign_order(SignOrder {
                order_id: created.data.order_id,
                deposit_amount: Some(Money::from_yuan(500)),
                method: Some(PaymentMethod::Transfer),
                user: UserId::new(),
            })
            .await
            .unwrap();

        let mut tx = service.store().begin().await.unwrap();
        let payment_id = tx.payments_for_order(created.data.order_id).await.unwrap()[0].id;
        drop(tx);

        let confirmed = service
            .confirm_payment(ConfirmPayment {
                payment_id,
                paid_at: None,
            })
            .await
            .unwrap();
        assert_eq!(confirmed.data.paid_amount, Money::from_yuan(500));
        assert_eq!(confirmed.data.total_amount, Money::from_yuan(300));
        assert_eq!(confirmed.data.unpaid_amount, Money::from_yuan(-200));

        service
            .start_order(StartOrder {
                order_id: created.data.order_id,
                foreman_id: Some(UserId::new()),
            })
            .await
            .unwrap();
        service
            .complete_order(CompleteOrder {
                order_id: created.data.order_id,
            })
            .await
            .unwrap();

        let mut tx = service.store().begin().await.unwrap();
        let order = tx.order(created.data.order_id).await.unwrap().unwrap();
        assert_eq!(order.status, OrderStatus::Completed);
        assert_eq!(order.unpaid_amount(), Money::from_yuan(-200));
        drop(tx);
        assert_eq!(
            customer_status(&service, customer.data.customer_id).await,
            CustomerStatus::Completed
        );
    }
}
