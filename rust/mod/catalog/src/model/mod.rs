mod breadcrumb;
mod manufacturer;
mod product;
mod user;

pub use breadcrumb::BreadcrumbNode;
pub use manufacturer::{manufacturer_name, Manufacturer, UNKNOWN_MANUFACTURER};
pub use product::{ImageUpload, Price, Product, ProductDraft, ProductPatch};
pub use user::{
    LoginRequest, LoginResponse, MeResponse, Role, User, ADMIN_ROLE_ID, ALGORITHMS_PAGE, HOME_PAGE,
    PRODUCTS_PAGE,
};
