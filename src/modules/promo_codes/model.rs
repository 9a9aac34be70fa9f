pub use academix_models::promo_codes::{
    CreatePromoCodeDto, GeneratedCode, PromoCode, PromoCodeFilterParams, PromoCodeWithUsage,
    UpdatePromoCodeDto,
};
