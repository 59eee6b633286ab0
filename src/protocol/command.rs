#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Ping,
    SidebarSelect,
    SidebarSelectMultiple,
    SidebarClear,
    SidebarState,
    SidebarUpperHeight,
    CrowdinStatus,
    CrowdinSignIn,
    CrowdinIsCallback,
    CrowdinCallback,
    CrowdinSignOut,
    CrowdinUserInfo,
    CrowdinProjects,
    CrowdinProjectInfo,
    CrowdinDownload,
    Unknown,
}

impl Command {
    pub fn is_sidebar(self) -> bool {
        matches!(
            self,
            Command::SidebarSelect
                | Command::SidebarSelectMultiple
                | Command::SidebarClear
                | Command::SidebarState
                | Command::SidebarUpperHeight
        )
    }
}

impl From<&str> for Command {
    fn from(s: &str) -> Self {
        match s {
            "ping" => Command::Ping,
            "sidebar.select" => Command::SidebarSelect,
            "sidebar.select_multiple" => Command::SidebarSelectMultiple,
            "sidebar.clear" => Command::SidebarClear,
            "sidebar.state" => Command::SidebarState,
            "sidebar.upper_height" => Command::SidebarUpperHeight,
            "crowdin.status" => Command::CrowdinStatus,
            "crowdin.sign_in" => Command::CrowdinSignIn,
            "crowdin.is_callback" => Command::CrowdinIsCallback,
            "crowdin.callback" => Command::CrowdinCallback,
            "crowdin.sign_out" => Command::CrowdinSignOut,
            "crowdin.user_info" => Command::CrowdinUserInfo,
            "crowdin.projects" => Command::CrowdinProjects,
            "crowdin.project_info" => Command::CrowdinProjectInfo,
            "crowdin.download" => Command::CrowdinDownload,
            _ => Command::Unknown,
        }
    }
}
