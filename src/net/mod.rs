//! # 着色 Petri 网核心定义
//!
//! 库所持有带颜色的托肯（多重集），迁移通过弧原子地在库所之间移动托肯：
//!
//! * 迁移 `t` **可发生** 当且仅当每条消耗弧 `(p, c, n)` 满足
//!   `|{tok ∈ M[p] : color(tok) = c}| ≥ n`，且同一库所上所有消耗弧的
//!   需求之和可以同时被满足；
//! * 迁移 **发生** 时先移除全部消耗托肯，再由着色产出弧、无色产出弧依次按声明
//!   顺序把颜色匹配的托肯放入目标库所；守卫不满足时任何库所都不改变。
//!
//! ## 示例
//!
//! ```rust
//! use rust_cpn::net::*;
//!
//! let mut net = Net::empty();
//! let p0 = net.add_place(Place::with_tokens("p0", ["red"]));
//! let p1 = net.add_place(Place::new("p1"));
//! let t0 = net.add_transition("t0").unwrap();
//!
//! net.add_input_arc(t0, p0, "red", 1).unwrap();
//! net.add_output_arc(t0, p1, "red", 1).unwrap();
//!
//! assert_eq!(net.enabled_transitions(), vec![t0]);
//! assert!(net.fire("t0").unwrap());
//! assert_eq!(net.place(p1).unwrap().contains(), 1);
//! assert!(!net.fire("t0").unwrap());
//! ```

pub mod arc;
pub mod core;
pub mod ids;
pub mod index_vec;
pub mod io;
pub mod place;
pub mod spec;
pub mod token;
pub mod transition;

pub use arc::{Amount, ArcColor, ConsumingArc, ProducingArc};
pub use self::core::{BuildError, DiagnosticReport, FireError, Net, NetError};
pub use ids::{PlaceId, TransitionId};
pub use index_vec::{Idx, IndexVec};
pub use place::{Place, TokenNotFound};
pub use spec::{ArcSpec, NetSpec, PlaceSpec, TransitionSpec};
pub use token::{Color, Token};
pub use transition::{OutputPolicy, Transition};
