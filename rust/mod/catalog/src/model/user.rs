use serde::{Deserialize, Serialize};

pub const HOME_PAGE: &str = "/";
pub const PRODUCTS_PAGE: &str = "/products";
pub const ALGORITHMS_PAGE: &str = "/algorithms";

/// Role id granted the algorithms page.
pub const ADMIN_ROLE_ID: u64 = 1;

/// A role with the pages it unlocks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Role {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub pages: Vec<String>,
}

impl Role {
    /// Expand a bare role id into a full role.
    pub fn from_id(id: u64) -> Self {
        if id == ADMIN_ROLE_ID {
            Self {
                id,
                name: "Admin".into(),
                pages: vec![PRODUCTS_PAGE.into(), ALGORITHMS_PAGE.into(), HOME_PAGE.into()],
            }
        } else {
            Self {
                id,
                name: "User".into(),
                pages: vec![PRODUCTS_PAGE.into(), HOME_PAGE.into()],
            }
        }
    }
}

/// The current identity. Roles are always canonical [`Role`] values;
/// the identity endpoint's integer-or-object union is resolved while
/// decoding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "UserWire")]
pub struct User {
    pub id: u64,
    pub name: String,
    pub email: String,
    pub roles: Vec<Role>,
}

impl User {
    pub fn role_ids(&self) -> impl Iterator<Item = u64> + '_ {
        self.roles.iter().map(|r| r.id)
    }

    pub fn has_any_role(&self, allowed: &[u64]) -> bool {
        self.role_ids().any(|id| allowed.contains(&id))
    }

    /// Whether any role lists `page`.
    pub fn can_view(&self, page: &str) -> bool {
        self.roles.iter().any(|r| r.pages.iter().any(|p| p == page))
    }
}

#[derive(Deserialize)]
struct UserWire {
    id: u64,
    #[serde(default)]
    name: String,
    #[serde(default)]
    email: String,
    #[serde(default)]
    roles: Vec<RoleWire>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RoleWire {
    Id(u64),
    Full(Role),
}

impl From<UserWire> for User {
    fn from(wire: UserWire) -> Self {
        let roles = wire
            .roles
            .into_iter()
            .map(|r| match r {
                RoleWire::Id(id) => Role::from_id(id),
                RoleWire::Full(role) => role,
            })
            .collect();
        Self {
            id: wire.id,
            name: wire.name,
            email: wire.email,
            roles,
        }
    }
}

/// `GET /me` envelope.
#[derive(Debug, Clone, Deserialize)]
pub struct MeResponse {
    pub user: User,
}

/// `POST /login` body.
#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// `POST /login` reply.
#[derive(Debug, Clone, Deserialize)]
pub struct LoginResponse {
    pub token: String,
    pub user: User,
}
