//! Integration tests for money arithmetic and product origins as a checkout
//! uses them.

use domain::{
    CartItem, Money, MoneyError, NANOS_PER_UNIT, OrderItem, OriginResolver, ProductId,
    ProductIdError, ProductOrigin,
};

fn usd(units: i64, nanos: i32) -> Money {
    Money::new("USD", units, nanos).unwrap()
}

mod money {
    use super::*;

    #[test]
    fn cart_total_is_exact() {
        // 0.10 * 3 + 0.20 never drifts the way floats do
        let lines = [
            OrderItem::new(CartItem::new("ONBQ:A", 3), usd(0, 100_000_000)),
            OrderItem::new(CartItem::new("ONBQ:B", 1), usd(0, 200_000_000)),
        ];

        let mut total = Money::zero("USD");
        for line in &lines {
            total = total.sum(&line.line_total().unwrap()).unwrap();
        }

        assert_eq!(total, usd(0, 500_000_000));
    }

    #[test]
    fn many_small_amounts_carry_into_units() {
        let cent = usd(0, 10_000_000);
        let mut total = Money::zero("USD");
        for _ in 0..250 {
            total = total.sum(&cent).unwrap();
        }
        assert_eq!(total, usd(2, 500_000_000));
        assert_eq!(total, cent.multiply(250).unwrap());
    }

    #[test]
    fn refund_style_negative_sum() {
        let charge = usd(10, 0);
        let refund = usd(-12, -500_000_000);
        let net = charge.sum(&refund).unwrap();

        assert_eq!(net, usd(-2, -500_000_000));
        assert!(net.is_negative());
    }

    #[test]
    fn large_quantity_multiplication() {
        let price = usd(0, 999_999_999);
        let product = price.multiply(u32::MAX).unwrap();
        assert_eq!(
            product.total_nanos(),
            i128::from(NANOS_PER_UNIT - 1) * i128::from(u32::MAX)
        );
    }

    #[test]
    fn mixing_currencies_fails() {
        let total = Money::zero("EUR").sum(&usd(1, 0));
        assert!(matches!(total, Err(MoneyError::CurrencyMismatch { .. })));
    }

    #[test]
    fn wire_format_round_trips_through_json() {
        let price = usd(18, 990_000_000);
        let json = serde_json::to_string(&price).unwrap();
        assert_eq!(json, r#"{"currency_code":"USD","units":18,"nanos":990000000}"#);
        assert_eq!(serde_json::from_str::<Money>(&json).unwrap(), price);
    }
}

mod origins {
    use super::*;

    #[test]
    fn internal_store_is_configurable() {
        let resolver = OriginResolver::new("SHOPX");
        assert_eq!(resolver.internal_store_id(), "SHOPX");
        assert_eq!(
            resolver.resolve(&ProductId::new("SHOPX:1")).unwrap(),
            ProductOrigin::Internal
        );
        assert!(resolver.is_external(&ProductId::new("ONBQ:1")));
    }

    #[test]
    fn malformed_id_is_an_error_not_a_guess() {
        let resolver = OriginResolver::default();
        assert!(matches!(
            resolver.resolve(&ProductId::new("OLJCESPC7Z")),
            Err(ProductIdError::Malformed(_))
        ));
    }
}
