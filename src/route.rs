use crate::{
	components::Guard,
	data::{Assignment, Book, LearningMaterial, Prayer, Role, Sermon, User, ZoomMeeting},
	page,
};
use yew::{html, Component, Context, Html};
use yew_router::Routable;

pub struct Switch<T>(std::marker::PhantomData<T>);
impl<T> Component for Switch<T>
where
	T: Routable + Routes + 'static,
{
	type Message = ();
	type Properties = ();

	fn create(_ctx: &Context<Self>) -> Self {
		Self(Default::default())
	}

	fn view(&self, _ctx: &Context<Self>) -> Html {
		html! {
			<yew_router::Switch<T> render={T::html} />
		}
	}
}

pub trait Routes {
	fn html(self) -> Html;

	fn switch() -> Html
	where
		Self: Routable + 'static,
	{
		html! { <Switch<Self> /> }
	}
}

#[derive(Debug, Clone, PartialEq, Routable)]
pub enum Route {
	#[at("/")]
	Home,
	#[at("/about")]
	About,
	#[at("/contact")]
	Contact,
	#[at("/sermons")]
	Sermons,
	#[at("/sermons/:id")]
	Sermon { id: String },
	#[at("/prayers")]
	Prayers,
	#[at("/prayers/:id")]
	Prayer { id: String },
	#[at("/books")]
	Books,
	#[at("/login")]
	Login,
	#[at("/register")]
	Register,
	#[at("/profile")]
	Profile,

	#[at("/student")]
	StudentDashboard,
	#[at("/student/materials")]
	StudentMaterials,
	#[at("/student/assignments")]
	StudentAssignments,
	#[at("/student/zoom-schedule")]
	ZoomSchedule,

	#[at("/clergy")]
	ClergyDashboard,
	#[at("/clergy/sermons")]
	ClergySermons,
	#[at("/clergy/prayers")]
	ClergyPrayers,

	#[at("/admin")]
	AdminDashboard,
	#[at("/admin/users")]
	AdminUsers,
	#[at("/admin/sermons")]
	AdminSermons,
	#[at("/admin/prayers")]
	AdminPrayers,
	#[at("/admin/books")]
	AdminBooks,
	#[at("/admin/assignments")]
	AdminAssignments,
	#[at("/admin/learning-materials")]
	AdminMaterials,
	#[at("/admin/material-drafts")]
	AdminDrafts,
	#[at("/admin/zoom")]
	AdminZoom,

	#[not_found]
	#[at("/404")]
	NotFound,
}

impl Route {
	pub fn dashboard_for(role: Role) -> Self {
		match role {
			Role::Student => Self::StudentDashboard,
			Role::Clergy => Self::ClergyDashboard,
			Role::Admin => Self::AdminDashboard,
		}
	}

	/// Role a signed-in user needs to open this route, if any.
	pub fn required_role(&self) -> Option<Role> {
		match self {
			Self::StudentDashboard | Self::StudentMaterials | Self::StudentAssignments | Self::ZoomSchedule => {
				Some(Role::Student)
			}
			Self::ClergyDashboard | Self::ClergySermons | Self::ClergyPrayers => Some(Role::Clergy),
			Self::AdminDashboard
			| Self::AdminUsers
			| Self::AdminSermons
			| Self::AdminPrayers
			| Self::AdminBooks
			| Self::AdminAssignments
			| Self::AdminMaterials
			| Self::AdminDrafts
			| Self::AdminZoom => Some(Role::Admin),
			_ => None,
		}
	}
}

impl Routes for Route {
	fn html(self) -> Html {
		let required = self.required_role();
		let content = match self {
			Self::Home => html!(<page::Home />),
			Self::About => html!(<page::About />),
			Self::Contact => html!(<page::Contact />),
			Self::Sermons => html!(<page::Catalog<Sermon> />),
			Self::Sermon { id } => html!(<page::Detail<Sermon> {id} />),
			Self::Prayers => html!(<page::Catalog<Prayer> />),
			Self::Prayer { id } => html!(<page::Detail<Prayer> {id} />),
			Self::Books => html!(<page::Catalog<Book> />),
			Self::Login => html!(<page::Login />),
			Self::Register => html!(<page::Register />),
			Self::Profile => html!(<page::Profile />),

			Self::StudentDashboard => html!(<page::StudentDashboard />),
			Self::StudentMaterials => html!(<page::Catalog<LearningMaterial> />),
			Self::StudentAssignments => html!(<page::StudentAssignments />),
			Self::ZoomSchedule => html!(<page::ZoomSchedule />),

			Self::ClergyDashboard => html!(<page::ClergyDashboard />),
			Self::ClergySermons => html!(<page::Manage<Sermon> scope={page::Scope::Mine} />),
			Self::ClergyPrayers => html!(<page::Manage<Prayer> />),

			Self::AdminDashboard => html!(<page::AdminDashboard />),
			Self::AdminUsers => html!(<page::Manage<User> />),
			Self::AdminSermons => html!(<page::Manage<Sermon> />),
			Self::AdminPrayers => html!(<page::Manage<Prayer> />),
			Self::AdminBooks => html!(<page::Manage<Book> />),
			Self::AdminAssignments => html!(<page::Manage<Assignment> />),
			Self::AdminMaterials => html!(<page::Manage<LearningMaterial> />),
			Self::AdminDrafts => html!(<page::Drafts />),
			Self::AdminZoom => html!(<page::Manage<ZoomMeeting> scope={page::Scope::Mine} />),

			Self::NotFound => html!(<page::NotFound />),
		};
		match required {
			Some(role) => html!(<Guard {role}>{content}</Guard>),
			None => content,
		}
	}
}
