use diesel::prelude::*;
use serde::Serialize;

use crate::schema::{gifts, participants};

// widths of the VARCHAR columns, counted in characters
pub const NAME_MAX_CHARS: usize = 255;
pub const EMAIL_MAX_CHARS: usize = 255;
pub const PHONE_MAX_CHARS: usize = 32;
pub const DESCRIPTION_MAX_CHARS: usize = 512;
pub const LINK_MAX_CHARS: usize = 2048;

#[derive(Queryable, Selectable, Serialize, Clone, Debug, PartialEq)]
#[diesel(table_name = participants)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Participant {
    pub id: i32,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
}

#[derive(Insertable, Clone, Copy, Debug)]
#[diesel(table_name = participants)]
pub struct NewParticipant<'a> {
    pub name: &'a str,
    pub email: &'a str,
    pub phone: Option<&'a str>,
}

#[derive(Queryable, Selectable, Serialize, Clone, Debug, PartialEq)]
#[diesel(table_name = gifts)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Gift {
    pub id: i32,
    pub participant_id: i32,
    pub description: String,
    pub link: Option<String>,
    pub price: f64,
}

#[derive(Insertable, Clone, Copy, Debug)]
#[diesel(table_name = gifts)]
pub struct NewGift<'a> {
    pub participant_id: i32,
    pub description: &'a str,
    pub link: Option<&'a str>,
    pub price: f64,
}
