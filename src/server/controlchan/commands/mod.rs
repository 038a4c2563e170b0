//! One handler per supported verb. Each module implements the protocol-level
//! contract of its command; cross-cutting rules (login gate, the RNFR/RNTO
//! two-step, the EPSV ALL lock) live in the dispatcher.

mod abor;
mod allo;
mod appe;
mod auth;
mod ccc;
mod cdup;
mod cwd;
mod dele;
mod eprt;
mod epsv;
mod feat;
mod list;
mod mdtm;
mod mkd;
mod mode;
mod nlst;
mod noop;
mod opts;
mod pass;
mod passive_common;
mod pasv;
mod pbsz;
mod port;
mod prot;
mod pwd;
mod quit;
mod rein;
mod rest;
mod retr;
mod rmd;
mod rnfr;
mod rnto;
mod size;
mod stat;
mod stor;
mod stou;
mod stru;
mod syst;
mod type_;
mod user;

pub(crate) use abor::Abor;
pub(crate) use allo::Allo;
pub(crate) use appe::Appe;
pub(crate) use auth::Auth;
pub(crate) use ccc::Ccc;
pub(crate) use cdup::Cdup;
pub(crate) use cwd::Cwd;
pub(crate) use dele::Dele;
pub(crate) use eprt::Eprt;
pub(crate) use epsv::Epsv;
pub(crate) use feat::Feat;
pub(crate) use list::List;
pub(crate) use mdtm::Mdtm;
pub(crate) use mkd::Mkd;
pub(crate) use mode::Mode;
pub(crate) use nlst::Nlst;
pub(crate) use noop::Noop;
pub(crate) use opts::Opts;
pub(crate) use pass::Pass;
pub(crate) use pasv::Pasv;
pub(crate) use pbsz::Pbsz;
pub(crate) use port::Port;
pub(crate) use prot::Prot;
pub(crate) use pwd::Pwd;
pub(crate) use quit::Quit;
pub(crate) use rein::Rein;
pub(crate) use rest::Rest;
pub(crate) use retr::Retr;
pub(crate) use rmd::Rmd;
pub(crate) use rnfr::Rnfr;
pub(crate) use rnto::Rnto;
pub(crate) use size::Size;
pub(crate) use stat::Stat;
pub(crate) use stor::Stor;
pub(crate) use stou::Stou;
pub(crate) use stru::Stru;
pub(crate) use syst::Syst;
pub(crate) use type_::Type;
pub(crate) use user::User;
